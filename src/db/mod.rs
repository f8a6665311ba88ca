/// Database access layer.
///
/// Repository functions take a `&PgPool` and return `sqlx::Error`; the
/// service layer translates those into API errors. Multi-step deletes run
/// inside a transaction so a crash mid-sequence cannot strand child rows.
pub mod comment_repo;
pub mod like_repo;
pub mod post_repo;
pub mod user_repo;
