pub mod mes;
