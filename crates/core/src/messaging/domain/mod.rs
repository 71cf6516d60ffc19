pub mod message_publisher;
