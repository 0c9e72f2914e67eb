mod concurrency;
mod errors;
mod pointers;
mod records;
mod sequences;
