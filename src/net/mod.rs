pub mod common;
pub mod gen_model_cmd;
pub mod model;
pub mod process;
pub mod serializer;
