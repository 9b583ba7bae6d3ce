//! 錯誤處理系統
//!
//! 呼叫端違反前置條件（越界、單位不存在、雙視圖不一致）一律回傳錯誤，
//! 不做靜默修正。已移動單位查詢移動範圍不是錯誤，回傳空集合。

use crate::alias::{Coord, MovementCost, UnitID};
use crate::core_types::{Faction, Position};
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// 棋盤錯誤
#[derive(Debug, ThisError)]
pub enum BoardError {
    #[error("位置超出棋盤邊界: ({x}, {y}) 邊界 ({width}, {height})")]
    OutOfBounds {
        x: Coord,
        y: Coord,
        width: Coord,
        height: Coord,
    },
    #[error("棋盤尺寸不合法: ({width}, {height})")]
    InvalidDimensions { width: Coord, height: Coord },
    #[error("位置 {pos:?} 已被單位 {occupant} 佔據")]
    CellOccupied { pos: Position, occupant: UnitID },
    #[error("位置 {pos:?} 沒有單位")]
    EmptyCell { pos: Position },
    #[error("位置 {pos:?} 只剩一層地形，無法移除")]
    LastTileInStack { pos: Position },
    #[error("目標 {pos:?} 不可到達")]
    NotReachable { pos: Position },
}

/// 格式載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("解析失敗: {0}")]
    ParseError(String),
    #[error("{format} 反序列化失敗: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("{format} 序列化失敗: {reason}")]
    SerializeError { format: String, reason: String },
    #[error("移動成本不合法: {terrain} / {move_type} = {cost}")]
    InvalidCost {
        terrain: String,
        move_type: String,
        cost: MovementCost,
    },
}

/// 單位相關錯誤
#[derive(Debug, ThisError)]
pub enum UnitError {
    #[error("單位不存在: {unit_id}")]
    UnitNotFound { unit_id: UnitID },
    #[error("單位 {unit_id} 不屬於任何陣營")]
    NoFaction { unit_id: UnitID },
    #[error("單位 {unit_id} 本回合已攻擊")]
    AlreadyAttacked { unit_id: UnitID },
    #[error("單位 {unit_id} 本回合已移動")]
    AlreadyMoved { unit_id: UnitID },
    #[error("單位 {unit_id} 無法攻擊 {pos:?}")]
    InvalidTarget { unit_id: UnitID, pos: Position },
    #[error("陣營 {faction:?} 不存在")]
    FactionNotFound { faction: Faction },
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[track_caller]
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.context(context)),
        }
    }
}
