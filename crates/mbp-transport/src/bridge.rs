//! Конвейер транспорта: мимикрия, затем преобразование
//!
//! Сырой байтовый поток сперва проходит tone-burst handshake своей роли;
//! только после успеха тот же поток передаётся внешнему преобразованию.
//! Ни на каком провале частично установленная сессия не возникает:
//! ошибка возвращается вызывающему, соединение подлежит закрытию.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use mbp_mimicry::{perform_handshake, MimicProtocol, Role};

use crate::config::{ClientConfig, ServerConfig};
use crate::error::{Result, TransportError};
use crate::transform::ConnectionTransform;

/// Провести инициаторский конвейер на готовом соединении
pub async fn establish_client<S, T>(
    mut connection: S,
    transform: &T,
    protocol: MimicProtocol,
    step_timeout: Duration,
) -> Result<T::Output>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: ConnectionTransform<S>,
{
    perform_handshake(protocol, Role::Initiator, &mut connection, step_timeout).await?;

    transform
        .apply(connection)
        .await
        .map_err(TransportError::TransformFailed)
}

/// Провести отвечающий конвейер на готовом соединении
pub async fn establish_server<S, T>(
    mut connection: S,
    transform: &T,
    protocol: MimicProtocol,
    step_timeout: Duration,
) -> Result<T::Output>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: ConnectionTransform<S>,
{
    perform_handshake(protocol, Role::Responder, &mut connection, step_timeout).await?;

    transform
        .apply(connection)
        .await
        .map_err(TransportError::TransformFailed)
}

/// Клиентская и серверная обвязка транспорта
pub struct Mockingbird;

impl Mockingbird {
    /// Подключиться к серверу по конфигурации и провести полный конвейер
    pub async fn connect<T>(config: &ClientConfig, transform: &T) -> Result<T::Output>
    where
        T: ConnectionTransform<TcpStream>,
    {
        info!("подключение к серверу {}", config.server_address);

        let stream = tokio::time::timeout(
            config.connect_timeout(),
            TcpStream::connect(&config.server_address),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout {
            address: config.server_address.clone(),
        })?
        .map_err(TransportError::ConnectFailed)?;

        debug!("TCP соединение установлено");
        establish_client(stream, transform, config.protocol, config.step_timeout()).await
    }

    /// Начать слушать по серверной конфигурации
    pub async fn listen(config: &ServerConfig) -> Result<MockingbirdListener> {
        MockingbirdListener::bind(config).await
    }
}

/// Слушатель входящих соединений транспорта
///
/// Каждое принятое соединение обслуживается собственной сессией; сессии
/// не разделяют изменяемого состояния.
pub struct MockingbirdListener {
    inner: TcpListener,
    protocol: MimicProtocol,
    step_timeout: Duration,
}

impl MockingbirdListener {
    /// Открыть слушающий сокет по серверной конфигурации
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let inner = TcpListener::bind(&config.server_address).await?;
        info!("сервер слушает на {}", config.server_address);

        Ok(Self {
            inner,
            protocol: config.protocol,
            step_timeout: config.step_timeout(),
        })
    }

    /// Фактический локальный адрес слушателя
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.inner.local_addr()
    }

    /// Принять одно соединение и провести отвечающий конвейер
    pub async fn accept<T>(&self, transform: &T) -> Result<T::Output>
    where
        T: ConnectionTransform<TcpStream>,
    {
        let (stream, peer) = self.inner.accept().await?;
        debug!("входящее соединение от {}", peer);

        establish_server(stream, transform, self.protocol, self.step_timeout).await
    }
}
