/*!
 * HTTP handlers, one nested module per area of the site
 *
 * Handlers only decode the request and shape the response, failures are returned as `AppError`
 * and rendered by the error middleware.
 */
use serde::de::DeserializeOwned;
use serde::Serialize;
use tide::{Body, Request, Response, StatusCode};

use crate::error::AppError;
use crate::AppState;

/**
 * Decode a JSON body, an empty body decodes as the default value
 */
async fn json_body<T>(req: &mut Request<AppState>) -> tide::Result<T>
where
    T: DeserializeOwned + Default,
{
    let body = req.body_string().await?;
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&body).map_err(|err| AppError::MalformedBody(err.to_string()).into())
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> tide::Result {
    Ok(Response::builder(status).body(Body::from_json(value)?).build())
}

/**
 * The `:id` path segment, anything that is not a valid id cannot name a record
 */
fn id_param(req: &Request<AppState>, kind: &'static str) -> Result<u64, AppError> {
    req.param("id")
        .ok()
        .and_then(|id| id.parse().ok())
        .ok_or(AppError::NotFound(kind))
}

pub mod news {
    use chrono::Utc;
    use tide::{Request, StatusCode};

    use crate::api_models::{NewsQuery, NewsResponse, TrendingResponse};
    use crate::news::{lookup, TRENDING};
    use crate::AppState;

    /**
     * GET /api/news?category=
     */
    pub async fn list(req: Request<AppState>) -> tide::Result {
        let query: NewsQuery = req.query()?;
        let response = NewsResponse {
            news: lookup(query.category.as_deref()),
            timestamp: Utc::now(),
        };
        super::json(StatusCode::Ok, &response)
    }

    /**
     * GET /api/trending
     */
    pub async fn trending(_req: Request<AppState>) -> tide::Result {
        let response = TrendingResponse {
            trending: &TRENDING,
            timestamp: Utc::now(),
        };
        super::json(StatusCode::Ok, &response)
    }
}

pub mod poll {
    use log::*;
    use tide::{Request, StatusCode};

    use crate::api_models::{Ballot, PollResponse, VoteResponse};
    use crate::error::AppError;
    use crate::tally::POLL;
    use crate::AppState;

    /**
     * GET /api/poll
     */
    pub async fn show(req: Request<AppState>) -> tide::Result {
        let results = req.state().tally.state();
        let response = PollResponse {
            poll: &POLL,
            results,
            total_votes: results.total(),
        };
        super::json(StatusCode::Ok, &response)
    }

    /**
     * POST /api/vote
     */
    pub async fn vote(mut req: Request<AppState>) -> tide::Result {
        let ballot: Ballot = super::json_body(&mut req).await?;
        let option = ballot.vote.ok_or(AppError::InvalidOption)?;
        let results = req.state().tally.cast(&option)?;
        debug!("Vote recorded: {}", option);

        let response = VoteResponse {
            message: "Vote recorded successfully",
            results,
            total_votes: results.total(),
        };
        super::json(StatusCode::Ok, &response)
    }
}

pub mod suggestions {
    use chrono::Utc;
    use tide::{Request, StatusCode};

    use crate::api_models::{NewSuggestion, SuggestionsResponse};
    use crate::models::Suggestion;
    use crate::store::Record;
    use crate::AppState;

    /**
     * GET /api/suggestions
     */
    pub async fn list(req: Request<AppState>) -> tide::Result {
        let response = SuggestionsResponse {
            suggestions: req.state().suggestions.list(),
            timestamp: Utc::now(),
        };
        super::json(StatusCode::Ok, &response)
    }

    /**
     * POST /api/suggestions
     */
    pub async fn create(mut req: Request<AppState>) -> tide::Result {
        let draft: NewSuggestion = super::json_body(&mut req).await?;
        let suggestion = req.state().suggestions.create(draft)?;
        super::json(StatusCode::Created, &suggestion)
    }

    /**
     * POST /api/suggestions/:id/vote
     */
    pub async fn vote(req: Request<AppState>) -> tide::Result {
        let id = super::id_param(&req, Suggestion::KIND)?;
        let suggestion = req.state().suggestions.vote_for(id)?;
        super::json(StatusCode::Ok, &suggestion)
    }
}

pub mod complaints {
    use chrono::Utc;
    use tide::{Request, StatusCode};

    use crate::api_models::{ComplaintsResponse, NewComplaint};
    use crate::models::Complaint;
    use crate::store::Record;
    use crate::AppState;

    /**
     * GET /api/complaints
     */
    pub async fn list(req: Request<AppState>) -> tide::Result {
        let response = ComplaintsResponse {
            complaints: req.state().complaints.list(),
            timestamp: Utc::now(),
        };
        super::json(StatusCode::Ok, &response)
    }

    /**
     * POST /api/complaints
     */
    pub async fn create(mut req: Request<AppState>) -> tide::Result {
        let draft: NewComplaint = super::json_body(&mut req).await?;
        let complaint = req.state().complaints.create(draft)?;
        super::json(StatusCode::Created, &complaint)
    }

    /**
     * POST /api/complaints/:id/vote
     */
    pub async fn vote(req: Request<AppState>) -> tide::Result {
        let id = super::id_param(&req, Complaint::KIND)?;
        let complaint = req.state().complaints.vote_for(id)?;
        super::json(StatusCode::Ok, &complaint)
    }
}

pub mod uploads {
    use tide::{Request, StatusCode};

    use crate::api_models::UploadResponse;
    use crate::AppState;

    /**
     * POST /api/upload
     *
     * Expects `multipart/form-data` with the file in the `image` field. The body is streamed
     * straight to disk and cut off at the configured upload limit.
     */
    pub async fn create(mut req: Request<AppState>) -> tide::Result {
        let content_type = req.header("Content-Type").map(|v| v.last().as_str().to_string());
        let base = format!(
            "{}://{}",
            req.url().scheme(),
            req.host().unwrap_or("localhost")
        );

        let body = req.take_body();
        let stored = req
            .state()
            .uploads
            .receive(content_type.as_deref(), body)
            .await?;

        let response = UploadResponse {
            url: format!("{}/uploads/{}", base, stored),
        };
        super::json(StatusCode::Ok, &response)
    }
}

pub mod directions {
    use tide::http::mime;
    use tide::{Request, Response, StatusCode};

    use crate::api_models::DirectionsQuery;
    use crate::AppState;

    /**
     * GET /api/directions?lat=&lng=
     */
    pub async fn show(req: Request<AppState>) -> tide::Result {
        let query: DirectionsQuery = req.query()?;
        let body = req
            .state()
            .directions
            .directions(query.lat.as_deref(), query.lng.as_deref())
            .await?;

        Ok(Response::builder(StatusCode::Ok)
            .body(body)
            .content_type(mime::JSON)
            .build())
    }
}

pub mod ui {
    use async_std::fs;
    use percent_encoding::percent_decode_str;
    use std::io::ErrorKind;
    use std::path::{Component, Path, PathBuf};
    use tide::{Body, Request, StatusCode};

    use crate::AppState;

    /**
     * Resolve a request path inside `root`, refusing anything that could climb out of it
     *
     * Each segment is percent-decoded on its own and must decode to a single plain file name, so
     * `%2e%2e` and `%2f` are refused just like their literal forms.
     */
    fn resolve(root: &Path, requested: &str) -> Option<PathBuf> {
        let mut path = root.to_path_buf();
        for segment in requested.split('/').filter(|s| !s.is_empty()) {
            let decoded = percent_decode_str(segment).decode_utf8().ok()?;
            let name: &str = &decoded;
            let mut components = Path::new(name).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) if part == name => path.push(part),
                _ => return None,
            }
        }
        Some(path)
    }

    async fn is_file(path: &Path) -> bool {
        fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
    }

    /**
     * GET *
     *
     * Serves files from the UI bundle, any other path gets the bundle's `index.html`
     */
    pub async fn index(req: Request<AppState>) -> tide::Result {
        let root = req.state().static_dir.as_path();
        let mut path = resolve(root, req.url().path()).unwrap_or_else(|| root.to_path_buf());
        if !is_file(&path).await {
            path = root.join("index.html");
        }

        match Body::from_file(&path).await {
            Ok(body) => Ok(body.into()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(tide::Error::from_str(StatusCode::NotFound, "Not found"))
            }
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn resolves_inside_the_root() {
            let root = Path::new("/srv/dist");
            assert_eq!(
                resolve(root, "/assets/app.js"),
                Some(PathBuf::from("/srv/dist/assets/app.js"))
            );
            assert_eq!(resolve(root, "/"), Some(PathBuf::from("/srv/dist")));
        }

        #[test]
        fn refuses_to_climb_out() {
            let root = Path::new("/srv/dist");
            assert_eq!(resolve(root, "/../etc/passwd"), None);
            assert_eq!(resolve(root, "/assets/../../secret"), None);
            assert_eq!(resolve(root, "/./index.html"), None);
        }

        #[test]
        fn decodes_escaped_names() {
            let root = Path::new("/srv/dist");
            assert_eq!(
                resolve(root, "/my%20logo.svg"),
                Some(PathBuf::from("/srv/dist/my logo.svg"))
            );
            assert_eq!(
                resolve(root, "/assets/caf%C3%A9.png"),
                Some(PathBuf::from("/srv/dist/assets/café.png"))
            );
        }

        #[test]
        fn refuses_escaped_traversal() {
            let root = Path::new("/srv/dist");
            assert_eq!(resolve(root, "/%2e%2e/etc/passwd"), None);
            assert_eq!(resolve(root, "/assets/%2E%2E/%2e%2e/secret"), None);
            assert_eq!(resolve(root, "/..%2Fsecret"), None);
            assert_eq!(resolve(root, "/assets%2F..%2F..%2Fsecret"), None);
            assert_eq!(resolve(root, "/%2Fetc%2Fpasswd"), None);
            assert_eq!(resolve(root, "/%ff.png"), None);
        }
    }
}
