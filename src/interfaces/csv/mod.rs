pub mod commission_writer;
pub mod transaction_reader;
