/// Business logic layer.
///
/// Each service owns one aggregate and a pool handle. Checks run in a
/// fixed order: existence first (404), then authorization (403), then
/// validation of the payload itself (400), then the mutation.
pub mod admin;
pub mod auth;
pub mod comments;
pub mod likes;
pub mod posts;
pub mod users;

pub use admin::AdminService;
pub use auth::AuthService;
pub use comments::CommentService;
pub use likes::LikeService;
pub use posts::PostService;
pub use users::UserService;
