pub mod decode;
pub mod subscription;
