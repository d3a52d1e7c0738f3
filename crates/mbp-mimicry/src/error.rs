//! Типы ошибок для mbp-mimicry
//!
//! Все ошибки фатальны для текущего прогона мимикрии: повторов шага внутри
//! одной сессии нет, решение о повторном handshake на новом соединении
//! принимает вызывающая сторона.

use thiserror::Error;

use crate::script::{MimicProtocol, Role};

/// Ошибки движка мимикрии
#[derive(Error, Debug)]
pub enum MimicryError {
    /// Принятые байты никогда не смогут удовлетворить грамматику
    #[error("Принятые данные не соответствуют ожидаемой грамматике")]
    GrammarMismatch,

    /// Лимит байт шага прослушивания исчерпан без совпадения
    #[error("Превышен лимит буфера прослушивания: {limit} байт")]
    BufferTooLarge {
        /// Настроенный лимит в байтах
        limit: usize,
    },

    /// Шаг сценария не уложился в отведённое время
    #[error("Шаг {step} не уложился в тайм-аут {timeout_ms} мс")]
    StepTimeout {
        /// Номер шага сценария (с единицы)
        step: usize,
        /// Тайм-аут шага в миллисекундах
        timeout_ms: u64,
    },

    /// Удалённая сторона закрыла соединение посреди сценария
    #[error("Соединение закрыто удалённой стороной")]
    ConnectionClosed,

    /// Ошибка записи в соединение
    #[error("Ошибка записи в соединение: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// Ошибка чтения из соединения
    #[error("Ошибка чтения из соединения: {0}")]
    ReadFailed(#[source] std::io::Error),

    /// Для пары (протокол, роль) не определён сценарий
    #[error("Сценарий для комбинации {protocol}/{role} не реализован")]
    Unimplemented {
        /// Запрошенный протокол мимикрии
        protocol: MimicProtocol,
        /// Запрошенная роль
        role: Role,
    },

    /// Регулярное выражение шаблона не компилируется
    #[error("Некорректное регулярное выражение '{pattern}': {source}")]
    InvalidPattern {
        /// Исходный текст шаблона
        pattern: String,
        /// Ошибка компиляции
        source: regex::Error,
    },

    /// Попытка отправить грамматику, содержащую шаблоны
    #[error("Грамматика с шаблонами предназначена только для прослушивания")]
    RenderUnsupported,
}

/// Псевдоним для Result с MimicryError
pub type Result<T> = std::result::Result<T, MimicryError>;
