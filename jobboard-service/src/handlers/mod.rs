//! REST handlers
//!
//! Generic handlers for the resource surface plus the error and response
//! types they return:
//!
//! - [`ApiError`]: maps every failure to a status code and JSON body
//! - [`ListResponse`] / [`PaginationMeta`]: the pagination envelope
//! - [`Created`]: `201` with the created entity
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{routing::get, Router};
//! use jobboard_service::handlers::resource;
//! use jobboard_service::models::Skill;
//!
//! let router: Router<AppState> = Router::new()
//!     .route("/skills", get(resource::list::<Skill>).post(resource::create::<Skill>));
//! ```

mod error;
mod response;
pub mod resource;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use response::{Created, ListResponse, PaginationMeta};
