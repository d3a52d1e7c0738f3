//! Профили мимикрии для различных протоколов
//!
//! Профиль — пара сценариев (по одному на роль), имитирующая handshake
//! конкретного реального протокола. Таблица профилей — данные; движок не
//! знает, какой протокол он имитирует.

pub mod smtp;

use crate::error::{MimicryError, Result};
use crate::script::{MimicProtocol, Role, ToneBurstScript};

/// Выбрать сценарий для пары (протокол, роль)
///
/// Комбинация, для которой в таблице нет сценария, завершается ошибкой
/// `Unimplemented`.
pub fn script_for(protocol: MimicProtocol, role: Role) -> Result<ToneBurstScript> {
    match (protocol, role) {
        (MimicProtocol::Smtp, Role::Initiator) => smtp::initiator_script(),
        (MimicProtocol::Smtp, Role::Responder) => smtp::responder_script(),
        (MimicProtocol::Pop3, _) => Err(MimicryError::Unimplemented { protocol, role }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_scripts_defined() {
        assert!(script_for(MimicProtocol::Smtp, Role::Initiator).is_ok());
        assert!(script_for(MimicProtocol::Smtp, Role::Responder).is_ok());
    }

    #[test]
    fn test_pop3_unimplemented() {
        let err = script_for(MimicProtocol::Pop3, Role::Initiator).unwrap_err();
        assert!(matches!(
            err,
            MimicryError::Unimplemented {
                protocol: MimicProtocol::Pop3,
                role: Role::Initiator,
            }
        ));
    }
}
