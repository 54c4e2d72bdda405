use crate::core::submission::Upload;
use crate::domain::forms::FormFields;
use bytes::Buf;
use futures::TryStreamExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection};

/// Multipart part name that carries the product image.
const IMAGE_PART: &str = "image";

#[derive(Debug)]
pub struct SubmissionBody {
    pub fields: FormFields,
    pub upload: Option<Upload>,
}

#[derive(Debug)]
pub struct InvalidBody(pub String);

impl warp::reject::Reject for InvalidBody {}

/// Accepts JSON, urlencoded and multipart bodies.
pub fn submission_body(
    max_bytes: u64,
) -> impl Filter<Extract = (SubmissionBody,), Error = Rejection> + Clone {
    let json = warp::body::content_length_limit(max_bytes)
        .and(warp::body::json::<Map<String, Value>>())
        .map(|object| SubmissionBody {
            fields: FormFields::from_json(object),
            upload: None,
        });

    let form = warp::body::content_length_limit(max_bytes)
        .and(warp::body::form::<HashMap<String, String>>())
        .map(|values: HashMap<String, String>| SubmissionBody {
            fields: values.into(),
            upload: None,
        });

    let multipart = warp::multipart::form()
        .max_length(max_bytes)
        .and_then(|form: FormData| async move {
            read_multipart(form)
                .await
                .map_err(|e| warp::reject::custom(InvalidBody(e.to_string())))
        });

    json.or(form).unify().or(multipart).unify()
}

async fn read_multipart(mut form: FormData) -> Result<SubmissionBody, warp::Error> {
    let mut fields = FormFields::new();
    let mut upload = None;

    while let Some(part) = form.try_next().await? {
        let name = part.name().to_string();
        let filename = part.filename().map(str::to_string);
        let data = read_part(part).await?;

        match filename {
            Some(filename) if name == IMAGE_PART => {
                upload = Some(Upload {
                    filename: Some(filename),
                    data,
                });
            }
            // 其他檔案欄位忽略
            Some(_) => {}
            None => fields.insert(name, String::from_utf8_lossy(&data).into_owned()),
        }
    }

    Ok(SubmissionBody { fields, upload })
}

async fn read_part(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(chunk.chunk());
            Ok(acc)
        })
        .await
}
