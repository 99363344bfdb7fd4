// Adapters layer: concrete properties mappers and storage backends.

pub mod json_mapper;
pub mod storage;
