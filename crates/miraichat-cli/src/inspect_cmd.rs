//! 解析并展示消息 JSON

use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use miraichat_core::{ChainError, ChatMessage, MessageChain, Segment};
use serde_json::Value;

pub fn run(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content).context("文件不是合法的 JSON")?;
    print!("{}", describe(value)?);
    Ok(())
}

/// 对象按聊天消息解析，数组按消息链解析
pub fn describe(value: Value) -> Result<String> {
    let mut out = String::new();

    let (chain, issues) = if value.is_array() {
        let (chain, issues) = MessageChain::decode(value)?;
        writeln!(out, "Message chain ({} segments)", chain.len())?;
        match chain.find_source() {
            Some(source) => writeln!(out, "Source: id={} time={}", source.id, source.time)?,
            None => writeln!(out, "Source: none (locally composed)")?,
        }
        (chain, issues)
    } else {
        let (message, issues) = ChatMessage::decode(value)?;
        writeln!(out, "Type: {}", message.context())?;
        writeln!(
            out,
            "Sender: {} ({}, {})",
            message.sender().display_name(),
            message.sender().id(),
            message.sender().shape()
        )?;
        if let Some(group_id) = message.group_id() {
            writeln!(out, "Group: {}", group_id)?;
        }
        writeln!(out, "Message id: {}", message.message_id())?;
        let (_, chain, _) = message.into_parts();
        (chain, issues)
    };

    writeln!(out, "Plain: {:?}", chain.plain_text())?;
    for (index, segment) in chain.iter().enumerate() {
        writeln!(out, "  [{}] {}", index, summarize(segment))?;
    }
    for issue in &issues {
        match issue {
            ChainError::MalformedSegment { kind, field } => {
                writeln!(out, "warning: {} segment missing `{}`, kept verbatim", kind, field)?
            }
            ChainError::NotASegment { index } => {
                writeln!(out, "warning: element {} has no `type`, kept verbatim", index)?
            }
            _ => {}
        }
    }

    Ok(out)
}

fn summarize(segment: &Segment) -> String {
    match segment {
        Segment::Plain(plain) => format!("Plain {:?}", plain.text),
        Segment::At(at) => format!("At {}", at.target),
        Segment::Quote(quote) => format!("Quote -> {}", quote.id),
        Segment::Unknown(unknown) if unknown.kind.is_empty() => format!("{} (not a segment)", unknown.raw),
        Segment::Unknown(unknown) => format!("{} (unrecognized)", unknown.kind),
        other => other.kind().to_string(),
    }
}
