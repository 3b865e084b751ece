pub mod base64_payload;
