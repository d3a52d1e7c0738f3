//! Конфигурация транспорта Mockingbird
//!
//! Клиент и сервер описываются парой JSON-файлов с общим адресом сервера и
//! половинами одной ключевой пары. Файлы генерируются вместе, чтобы ключи
//! гарантированно соответствовали друг другу.

use anyhow::{bail, Context};
use mbp_mimicry::MimicProtocol;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::keys::{public_key_from_hex, TransportKeypair};

/// Имя транспорта в конфигурационных файлах
pub const TRANSPORT_NAME: &str = "Mockingbird";

/// Имя файла серверной конфигурации
pub const SERVER_CONFIG_FILENAME: &str = "MockingbirdServerConfig.json";

/// Имя файла клиентской конфигурации
pub const CLIENT_CONFIG_FILENAME: &str = "MockingbirdClientConfig.json";

/// Конфигурация клиента
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Адрес сервера в виде "host:port"
    pub server_address: String,

    /// Публичный ключ сервера (hex) для внешнего слоя обфускации
    pub server_public_key: String,

    /// Имя транспорта
    #[serde(default = "default_transport")]
    pub transport: String,

    /// Имитируемый протокол
    #[serde(default = "default_protocol")]
    pub protocol: MimicProtocol,

    /// Тайм-аут TCP подключения (секунды)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Тайм-аут одного шага мимикрии (секунды)
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,
}

/// Конфигурация сервера
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Адрес, на котором сервер слушает, в виде "host:port"
    pub server_address: String,

    /// Секретный ключ сервера (hex) для внешнего слоя обфускации
    pub server_private_key: String,

    /// Имя транспорта
    #[serde(default = "default_transport")]
    pub transport: String,

    /// Имитируемый протокол
    #[serde(default = "default_protocol")]
    pub protocol: MimicProtocol,

    /// Тайм-аут одного шага мимикрии (секунды)
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,
}

// Значения по умолчанию
fn default_transport() -> String {
    TRANSPORT_NAME.to_string()
}

fn default_protocol() -> MimicProtocol {
    MimicProtocol::Smtp
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_step_timeout() -> u64 {
    10
}

impl ClientConfig {
    /// Создать и проверить клиентскую конфигурацию
    pub fn new(server_address: &str, server_public_key: &str) -> anyhow::Result<Self> {
        let config = Self {
            server_address: server_address.trim().to_string(),
            server_public_key: server_public_key.to_string(),
            transport: default_transport(),
            protocol: default_protocol(),
            connect_timeout_secs: default_connect_timeout(),
            step_timeout_secs: default_step_timeout(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Валидация конфигурации
    pub fn validate(&self) -> anyhow::Result<()> {
        parse_server_address(&self.server_address)?;
        public_key_from_hex(&self.server_public_key)
            .context("некорректный публичный ключ сервера")?;
        Ok(())
    }

    /// Хост сервера
    pub fn server_host(&self) -> anyhow::Result<String> {
        Ok(parse_server_address(&self.server_address)?.0)
    }

    /// Порт сервера
    pub fn server_port(&self) -> anyhow::Result<u16> {
        Ok(parse_server_address(&self.server_address)?.1)
    }

    /// Тайм-аут TCP подключения
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Тайм-аут одного шага мимикрии
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Загрузить конфигурацию из JSON файла
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("не удалось прочитать {}", path.as_ref().display()))?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Сохранить конфигурацию в JSON файл
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("не удалось записать {}", path.as_ref().display()))?;
        Ok(())
    }
}

impl ServerConfig {
    /// Создать и проверить серверную конфигурацию
    pub fn new(server_address: &str, server_private_key: &str) -> anyhow::Result<Self> {
        let config = Self {
            server_address: server_address.trim().to_string(),
            server_private_key: server_private_key.to_string(),
            transport: default_transport(),
            protocol: default_protocol(),
            step_timeout_secs: default_step_timeout(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Валидация конфигурации
    pub fn validate(&self) -> anyhow::Result<()> {
        parse_server_address(&self.server_address)?;
        self.keypair()?;
        Ok(())
    }

    /// Ключевая пара сервера, восстановленная из конфигурации
    pub fn keypair(&self) -> anyhow::Result<TransportKeypair> {
        TransportKeypair::from_private_hex(&self.server_private_key)
            .context("некорректный секретный ключ сервера")
    }

    /// Тайм-аут одного шага мимикрии
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Загрузить конфигурацию из JSON файла
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("не удалось прочитать {}", path.as_ref().display()))?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Сохранить конфигурацию в JSON файл
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("не удалось записать {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Сгенерировать согласованную пару конфигураций со свежей ключевой парой
pub fn generate_config_pair(
    server_address: &str,
) -> anyhow::Result<(ServerConfig, ClientConfig)> {
    let mut rng = OsRng;
    let keypair = TransportKeypair::generate(&mut rng);

    let server = ServerConfig::new(server_address, &keypair.private_hex())?;
    let client = ClientConfig::new(server_address, &keypair.public_hex())?;
    Ok((server, client))
}

/// Сгенерировать пару конфигураций и записать её в директорию
pub fn write_config_files<P: AsRef<Path>>(
    directory: P,
    server_address: &str,
) -> anyhow::Result<()> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        bail!("путь {} не является директорией", directory.display());
    }

    let (server, client) = generate_config_pair(server_address)?;
    server.to_file(directory.join(SERVER_CONFIG_FILENAME))?;
    client.to_file(directory.join(CLIENT_CONFIG_FILENAME))?;
    Ok(())
}

fn parse_server_address(address: &str) -> anyhow::Result<(String, u16)> {
    let Some((host, port)) = address.rsplit_once(':') else {
        bail!("адрес '{}' должен иметь вид host:port", address);
    };

    if host.is_empty() {
        bail!("адрес '{}' не содержит хоста", address);
    }

    let port: u16 = port
        .parse()
        .with_context(|| format!("некорректный порт в адресе '{}'", address))?;
    if port == 0 {
        bail!("порт сервера не может быть 0");
    }

    Ok((host.to_string(), port))
}
