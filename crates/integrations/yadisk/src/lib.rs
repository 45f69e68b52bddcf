//! Yandex Disk adapter for darkroom.
//!
//! [`YandexDiskStorage`] implements
//! [`CloudStorage`](darkroom_provider::CloudStorage) over the
//! [Disk REST API](https://yandex.ru/dev/disk-api/doc/en/).

pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::YandexDiskConfig;
pub use error::YandexDiskError;
pub use storage::YandexDiskStorage;
