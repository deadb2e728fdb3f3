pub mod bank_writer;
