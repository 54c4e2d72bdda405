use crate::core::submission::SubmissionService;
use crate::core::{Kind, Record, Storage};
use crate::domain::model::CATEGORIES;
use crate::server::body::{InvalidBody, SubmissionBody};
use crate::utils::error::SiteError;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::{StatusCode, Uri};
use warp::reply::{Reply, Response};
use warp::Rejection;

/// How a creation endpoint answers a successful submission.
#[derive(Debug, Clone, Copy)]
pub enum Flow {
    Redirect(&'static str),
    Text(&'static str),
    /// `{success, message, doc}` acknowledgement, with the message for a
    /// server-side failure.
    Json {
        accepted: &'static str,
        failed: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FormRoute {
    pub path: &'static str,
    pub kind: Kind,
    pub flow: Flow,
}

pub const FORM_ROUTES: [FormRoute; 8] = [
    FormRoute {
        path: "submit-contact",
        kind: Kind::Contact,
        flow: Flow::Text("Message received successfully."),
    },
    FormRoute {
        path: "submit-forum",
        kind: Kind::Forum,
        flow: Flow::Redirect("/success.html"),
    },
    FormRoute {
        path: "submit-marketplace",
        kind: Kind::Marketplace,
        flow: Flow::Redirect("/success.html"),
    },
    FormRoute {
        path: "submit-membership",
        kind: Kind::Membership,
        flow: Flow::Redirect("/success.html"),
    },
    FormRoute {
        path: "submit-membership-alt",
        kind: Kind::Membership,
        flow: Flow::Json {
            accepted: "Membership submitted successfully!",
            failed: "Failed to save membership.",
        },
    },
    FormRoute {
        path: "submit-school",
        kind: Kind::School,
        flow: Flow::Redirect("/success.html"),
    },
    FormRoute {
        path: "submit-tour",
        kind: Kind::Tour,
        flow: Flow::Redirect("/thank-you.html"),
    },
    FormRoute {
        path: "submit-product",
        kind: Kind::Product,
        flow: Flow::Redirect("/products.html"),
    },
];

pub async fn submit<S: Storage>(
    route: FormRoute,
    service: Arc<SubmissionService<S>>,
    body: SubmissionBody,
) -> Result<Response, Infallible> {
    let result = service.submit(route.kind, &body.fields, body.upload).await;

    let response = match (result, route.flow) {
        (Ok(_), Flow::Redirect(location)) => {
            warp::redirect::see_other(Uri::from_static(location)).into_response()
        }
        (Ok(_), Flow::Text(message)) => {
            warp::reply::with_status(message, StatusCode::OK).into_response()
        }
        (Ok(outcome), Flow::Json { accepted, .. }) => warp::reply::json(&json!({
            "success": true,
            "message": accepted,
            "doc": outcome.record,
        }))
        .into_response(),
        (Err(e), flow) => {
            let status = status_for(&e);
            if !e.is_client_error() {
                tracing::error!("Error handling /{}: {}", route.path, e);
            }
            match flow {
                Flow::Json { failed, .. } => {
                    let message = if e.is_client_error() {
                        e.to_string()
                    } else {
                        failed.to_string()
                    };
                    warp::reply::with_status(
                        warp::reply::json(&json!({ "success": false, "message": message })),
                        status,
                    )
                    .into_response()
                }
                _ => warp::reply::with_status(client_message(&e), status).into_response(),
            }
        }
    };

    Ok(response)
}

pub async fn list_products<S: Storage>(
    service: Arc<SubmissionService<S>>,
) -> Result<Response, Infallible> {
    let result = service.store().list_all(Kind::Product).await;
    Ok(records_response(result, "Failed to read products"))
}

pub async fn products_by_category<S: Storage>(
    category: String,
    service: Arc<SubmissionService<S>>,
) -> Result<Response, Infallible> {
    let category = decode_segment(category);
    let result = service
        .store()
        .list_by_category(Kind::Product, &category)
        .await;
    Ok(records_response(result, "Failed to filter products"))
}

pub async fn businesses_by_category<S: Storage>(
    category: String,
    service: Arc<SubmissionService<S>>,
) -> Result<Response, Infallible> {
    let category = decode_segment(category);
    let result = service
        .store()
        .list_by_category(Kind::Marketplace, &category)
        .await;
    Ok(records_response(result, "Failed to read businesses"))
}

pub async fn categories() -> Result<Response, Infallible> {
    Ok(warp::reply::json(&CATEGORIES).into_response())
}

pub async fn handle_rejection(err: Rejection) -> Result<Response, Rejection> {
    if let Some(InvalidBody(message)) = err.find::<InvalidBody>() {
        tracing::debug!("Rejected request body: {}", message);
        return Ok(warp::reply::with_status(
            format!("Invalid request body: {message}"),
            StatusCode::BAD_REQUEST,
        )
        .into_response());
    }
    Err(err)
}

fn records_response(result: crate::utils::error::Result<Vec<Record>>, failure: &str) -> Response {
    match result {
        Ok(records) => warp::reply::json(&records).into_response(),
        Err(e) => {
            tracing::error!("{}: {}", failure, e);
            warp::reply::with_status(
                warp::reply::json(&json!({ "error": failure })),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    }
}

fn status_for(err: &SiteError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn client_message(err: &SiteError) -> String {
    if err.is_client_error() {
        err.to_string()
    } else {
        "Error submitting form".to_string()
    }
}

// warp 不會解碼路徑參數，例如 Food%20%26%20Beverages
fn decode_segment(raw: String) -> String {
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_segment() {
        assert_eq!(
            decode_segment("Food%20%26%20Beverages".to_string()),
            "Food & Beverages"
        );
        assert_eq!(decode_segment("Health".to_string()), "Health");
        assert_eq!(decode_segment("%FF".to_string()), "%FF");
    }

    #[test]
    fn test_every_kind_has_a_form_route() {
        for kind in Kind::ALL {
            assert!(FORM_ROUTES.iter().any(|r| r.kind == kind), "{kind} has no route");
        }
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            status_for(&SiteError::validation(["email"])),
            StatusCode::BAD_REQUEST
        );
        let corrupt = SiteError::StoreCorruptError {
            kind: Kind::Tour,
            message: "eof".to_string(),
        };
        assert_eq!(status_for(&corrupt), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(client_message(&corrupt), "Error submitting form");
    }
}
