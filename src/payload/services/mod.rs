//! Application services for payload intake.

mod intake;

pub use intake::{
    DataPayloadService, DataPayloadServiceError, PAYLOAD_TASK_TYPE_DESCRIPTION,
    PAYLOAD_TASK_TYPE_NAME,
};
