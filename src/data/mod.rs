pub mod loader;
pub mod schema;
pub mod storage;
pub mod transform;
pub mod validator;
