pub mod priorities;
