//! # Mockingbird Mimicry (mbp-mimicry)
//!
//! Движок протокольной мимикрии для транспорта Mockingbird.
//!
//! До того как внешний слой обфускации возьмёт соединение себе, этот крейт
//! разыгрывает на нём сценарий «tone-burst»: скриптованный обмен репликами,
//! из-за которого пассивный и активный наблюдатель классифицируют соединение
//! как безобидную сессию известного протокола (эталонный профиль — SMTP
//! вплоть до согласования STARTTLS).
//!
//! ## Возможности
//!
//! - **Структурированный текст**: декларативная грамматика из литералов,
//!   шаблонов (регулярных выражений) и окончаний строк
//! - **Потоковый матчер**: побайтовое накопление с трёхзначным вердиктом
//!   (неполно / провал / успех) после каждого байта и лимитом буфера
//! - **Сценарии**: чередование шагов «сказать»/«слушать» на пару
//!   (протокол, роль); таблица профилей — данные, движок протоколонезависим
//! - **Движок**: строго последовательное исполнение с тайм-аутом каждого
//!   шага; первый провал фатален для прогона
//!
//! ## Пример использования
//!
//! ```rust,no_run
//! use mbp_mimicry::{perform_handshake, MimicProtocol, Role, DEFAULT_STEP_TIMEOUT};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (mut initiator_end, mut responder_end) = tokio::io::duplex(1024);
//!
//! let responder = tokio::spawn(async move {
//!     perform_handshake(
//!         MimicProtocol::Smtp,
//!         Role::Responder,
//!         &mut responder_end,
//!         DEFAULT_STEP_TIMEOUT,
//!     )
//!     .await
//! });
//!
//! perform_handshake(
//!     MimicProtocol::Smtp,
//!     Role::Initiator,
//!     &mut initiator_end,
//!     DEFAULT_STEP_TIMEOUT,
//! )
//! .await?;
//!
//! responder.await??;
//! // Обе стороны дошли до конца сценария: соединение готово для
//! // следующего слоя преобразований.
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod matcher;
pub mod profiles;
pub mod script;
pub mod text;

// Re-экспорт основных типов
pub use engine::{perform_handshake, ToneBurst, ToneBurstSession, DEFAULT_STEP_TIMEOUT};
pub use error::{MimicryError, Result};
pub use matcher::{StreamingMatcher, DEFAULT_MAX_LISTEN_BYTES};
pub use profiles::script_for;
pub use script::{MimicProtocol, Role, ToneBurstScript, ToneBurstStep};
pub use text::{LineEnding, MatchOutcome, StructuredText, TextPattern, TextToken};

/// Версия библиотеки
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
