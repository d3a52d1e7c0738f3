//! Типы ошибок для mbp-transport

use mbp_mimicry::MimicryError;
use thiserror::Error;

/// Ошибки транспортной обвязки
#[derive(Error, Debug)]
pub enum TransportError {
    /// Ключ не является корректной hex-строкой
    #[error("Некорректная hex-кодировка ключа")]
    InvalidKeyEncoding,

    /// Ключ имеет неверную длину
    #[error("Некорректный размер ключа: ожидается {expected} байт, получено {actual}")]
    InvalidKeySize {
        /// Ожидаемая длина в байтах
        expected: usize,
        /// Фактическая длина в байтах
        actual: usize,
    },

    /// TCP подключение не уложилось в тайм-аут
    #[error("Тайм-аут подключения к {address}")]
    ConnectTimeout {
        /// Адрес, к которому шло подключение
        address: String,
    },

    /// TCP подключение не удалось
    #[error("Не удалось установить TCP соединение: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Handshake мимикрии провалился
    #[error("Ошибка мимикрии: {0}")]
    Mimicry(#[from] MimicryError),

    /// Внешний слой преобразования отверг соединение
    #[error("Ошибка применения преобразования соединения: {0}")]
    TransformFailed(#[source] std::io::Error),

    /// Прочие ошибки ввода-вывода
    #[error("Ошибка I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Псевдоним для Result с TransportError
pub type Result<T> = std::result::Result<T, TransportError>;
