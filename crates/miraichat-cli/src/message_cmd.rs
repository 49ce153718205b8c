//! 消息发送 CLI 工具

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use miraichat_channels::{MessageTransport, MiraiHttpTransport, ReplyTarget};
use miraichat_core::{GatewayConfig, MessageChain, PokeKind, Quote, Segment};

#[derive(Debug, Subcommand)]
pub enum MessageCommand {
    /// Send a plain text message
    Send {
        /// Friend or member QQ number
        #[arg(long)]
        to: Option<i64>,
        /// Group number (with --to: temp session through this group)
        #[arg(long)]
        group: Option<i64>,
        /// Message text
        #[arg(short, long)]
        text: String,
        /// Quote the message with this id
        #[arg(long)]
        quote: Option<i64>,
    },
    /// Send a poke gesture (Poke, ShowLove, Like, Heartbroken, SixSixSix, FangDaZhao)
    Poke {
        #[arg(long)]
        to: Option<i64>,
        #[arg(long)]
        group: Option<i64>,
        #[arg(long, default_value = "Poke")]
        kind: PokeKind,
    },
}

impl MessageCommand {
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let config = GatewayConfig::load(config_path)?.with_env_overrides();
        let transport = MiraiHttpTransport::new(config)?;

        let receipt = match self {
            MessageCommand::Send {
                to,
                group,
                text,
                quote,
            } => {
                let target = resolve_target(*to, *group)?;
                let chain = compose(text, *quote);
                tracing::info!(?target, "Sending message via {}", transport.name());
                transport.send_message(&target, chain).await?
            }
            MessageCommand::Poke { to, group, kind } => {
                let target = resolve_target(*to, *group)?;
                tracing::info!(?target, %kind, "Sending poke via {}", transport.name());
                transport.send_poke(&target, *kind).await?
            }
        };

        match receipt.message_id {
            Some(id) => println!("✅ Sent, message id {}", id),
            None => println!("✅ Sent"),
        }
        Ok(())
    }
}

fn resolve_target(to: Option<i64>, group: Option<i64>) -> Result<ReplyTarget> {
    match (to, group) {
        (Some(qq), Some(group)) => Ok(ReplyTarget::Temp { qq, group }),
        (Some(qq), None) => Ok(ReplyTarget::Friend { qq }),
        (None, Some(group)) => Ok(ReplyTarget::Group { group }),
        (None, None) => anyhow::bail!("Either --to or --group is required"),
    }
}

fn compose(text: &str, quote: Option<i64>) -> MessageChain {
    let body = MessageChain::from(text);
    match quote {
        Some(id) => MessageChain::from(Segment::Quote(Quote {
            id,
            group_id: None,
            sender_id: None,
            target_id: None,
            origin: None,
        }))
        .concat(body),
        None => body,
    }
}
