//! HTTP surface: form endpoints, catalog reads and static files.

pub mod body;
pub mod handlers;

use crate::core::submission::SubmissionService;
use crate::core::Storage;
use crate::utils::error::{Result, SiteError};
use handlers::FORM_ROUTES;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

fn with_service<S: Storage + 'static>(
    service: Arc<SubmissionService<S>>,
) -> impl Filter<Extract = (Arc<SubmissionService<S>>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// One POST route per entry of the form route table.
fn form_routes<S: Storage + 'static>(
    service: Arc<SubmissionService<S>>,
    max_body_bytes: u64,
) -> BoxedFilter<(Response,)> {
    let none = warp::any()
        .and_then(|| async { Err::<Response, Rejection>(warp::reject::not_found()) })
        .boxed();

    FORM_ROUTES.into_iter().fold(none, |routes, route| {
        let endpoint = warp::post()
            .and(warp::path(route.path))
            .and(warp::path::end())
            .and(with_service(service.clone()))
            .and(body::submission_body(max_body_bytes))
            .and_then(
                move |service: Arc<SubmissionService<S>>, payload: body::SubmissionBody| {
                    handlers::submit(route, service, payload)
                },
            );

        routes.or(endpoint).unify().boxed()
    })
}

fn api_routes<S: Storage + 'static>(
    service: Arc<SubmissionService<S>>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let products = warp::path!("api" / "products")
        .and(with_service(service.clone()))
        .and_then(handlers::list_products::<S>);

    let products_by_category = warp::path!("api" / "products" / String)
        .and(with_service(service.clone()))
        .and_then(handlers::products_by_category::<S>);

    let businesses = warp::path!("api" / "businesses" / String)
        .and(with_service(service))
        .and_then(handlers::businesses_by_category::<S>);

    let categories = warp::path!("categories").and_then(handlers::categories);

    warp::get().and(
        products
            .or(products_by_category)
            .unify()
            .or(businesses)
            .unify()
            .or(categories)
            .unify(),
    )
}

/// Every route the site serves.
pub fn routes<S: Storage + 'static>(
    service: Arc<SubmissionService<S>>,
    public_root: PathBuf,
    max_body_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // public 目錄同時提供 /uploads/* 與 /data/products.json
    let static_files = warp::get().and(warp::fs::dir(public_root));

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_headers(vec!["content-type"]);

    api_routes(service.clone())
        .or(form_routes(service, max_body_bytes))
        .unify()
        .or(static_files.map(|file: warp::fs::File| file.into_response()))
        .unify()
        .recover(handlers::handle_rejection)
        .with(cors)
        .with(warp::trace::request())
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn serve<S, F>(
    addr: SocketAddr,
    service: Arc<SubmissionService<S>>,
    public_root: PathBuf,
    max_body_bytes: u64,
    shutdown: F,
) -> Result<()>
where
    S: Storage + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let routes = routes(service, public_root, max_body_bytes);
    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| SiteError::ConfigError {
            message: format!("cannot bind {addr}: {e}"),
        })?;

    tracing::info!("🚀 Server running at http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}
