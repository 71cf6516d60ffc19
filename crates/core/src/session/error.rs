use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The caller's session-bound ticket does not match the ticket named in
    /// the request. An authorization failure, not a business-logic branch;
    /// no state changes.
    #[error("ticket {requested} does not belong to this session")]
    InvalidTicket { requested: String },

    /// Decoded upload exceeds the size cap.
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    /// Upload payload could not be decoded (malformed data URI or base64).
    #[error("invalid upload payload: {0}")]
    InvalidPayload(String),

    /// Object store call failed; counts and uploads propagate this as-is.
    #[error("object store failure")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The queue rejected the merge request. Nothing was committed before
    /// the publish, so there is no compensating action.
    #[error("merge request for ticket {ticket} was not accepted")]
    MergePublish {
        ticket: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
