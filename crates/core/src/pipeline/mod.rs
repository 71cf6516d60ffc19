pub mod infrastructure;
pub mod merge_session_use_case;
pub mod normalize_face_use_case;
pub mod process_upload_use_case;
