pub mod comment;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentThread, CommentWithAuthor, CreateCommentRequest, UpdateCommentRequest};
pub use like::{Like, LikeStatus, ToggleOutcome};
pub use post::{
    AdminPostDetail, CreatePostRequest, Post, PostDetail, PostListItem, PostPatch, PostSort,
    PostStatus, PostSummary, PostWithAuthor,
};
pub use user::{
    AdminUserDetail, AdminUserPatch, AuthorSummary, ChangePasswordRequest, LoginRequest,
    ProfilePatch, PublicUser, RegisterRequest, Role, User, UserProfile,
};
