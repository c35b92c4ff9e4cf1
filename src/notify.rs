//! 向所有活跃会话发送消息

use tracing::info;

use crate::config::NotifyConfig;
use crate::error::Result;
use crate::jellyfin::{MediaServer, MessageCommand, SessionInfo};

/// 会话是否应该收到消息：必须有 ID，且设备不在排除列表中
fn is_recipient(session: &SessionInfo, excluded_devices: &[String]) -> bool {
    session.id.is_some()
        && !session
            .device_name
            .as_ref()
            .map_or(false, |device| excluded_devices.contains(device))
}

/// 向每个符合条件的会话依次发送消息，返回发送数量
pub async fn broadcast_message(
    server: &dyn MediaServer,
    message: &str,
    header: Option<&str>,
    config: &NotifyConfig,
) -> Result<usize> {
    let sessions = server.sessions().await?;
    info!("会话数量: {}", sessions.len());

    let command = MessageCommand {
        text: message.to_string(),
        header: header.map(str::to_string),
        timeout_ms: config.timeout_ms,
    };

    let mut sent = 0;
    for session in sessions
        .iter()
        .filter(|s| is_recipient(s, &config.excluded_devices))
    {
        let Some(session_id) = session.id.as_deref() else {
            continue;
        };
        info!(
            "发送消息到会话: {} - {} ({})",
            session.user_name.as_deref().unwrap_or("?"),
            session.device_name.as_deref().unwrap_or("?"),
            session.client.as_deref().unwrap_or("?")
        );
        server.send_message(session_id, &command).await?;
        sent += 1;
    }

    Ok(sent)
}
