//! # Mockingbird Transport (mbp-transport)
//!
//! Обвязка транспорта Mockingbird вокруг движка мимикрии [`mbp_mimicry`].
//!
//! Крейт отвечает за всё, что окружает сам handshake: пару JSON-конфигураций
//! клиента и сервера, генерацию ключей для внешнего слоя обфускации,
//! интерфейс этого слоя и конвейер, который сперва разыгрывает tone-burst
//! сценарий, а затем отдаёт то же соединение преобразованию.
//!
//! ## Возможности
//!
//! - **Конфигурация**: согласованная пара JSON-файлов клиент/сервер с
//!   общим адресом и половинами одной ключевой пары
//! - **Ключи**: генерация X25519 пары и hex-представление для конфигов
//! - **Конвейер**: мимикрия → внешнее преобразование, без частично
//!   установленных сессий при провале
//! - **TCP обвязка**: подключение с тайм-аутом и слушатель входящих
//!   соединений, по сессии на соединение
//!
//! ## Пример использования
//!
//! ```rust,no_run
//! use mbp_transport::config::generate_config_pair;
//! use mbp_transport::{Mockingbird, Passthrough};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let (server_config, client_config) = generate_config_pair("127.0.0.1:2525")?;
//!
//! let listener = Mockingbird::listen(&server_config).await?;
//! tokio::spawn(async move {
//!     // Настоящий сервер подставил бы здесь своё преобразование
//!     let _connection = listener.accept(&Passthrough).await;
//! });
//!
//! let _connection = Mockingbird::connect(&client_config, &Passthrough).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod keys;
pub mod transform;

// Re-экспорт основных типов
pub use bridge::{establish_client, establish_server, Mockingbird, MockingbirdListener};
pub use config::{generate_config_pair, write_config_files, ClientConfig, ServerConfig};
pub use error::{Result, TransportError};
pub use keys::TransportKeypair;
pub use transform::{ConnectionTransform, Passthrough};

/// Версия библиотеки
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
