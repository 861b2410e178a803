pub mod article;
pub mod author;
pub mod check;
pub mod feed;

pub use article::Article;
pub use author::Author;
pub use check::CheckResult;
pub use feed::Feed;
