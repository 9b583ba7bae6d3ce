//! 核心業務邏輯：求解器只讀棋盤，提交操作才會變動棋盤

pub mod battle;
pub mod id_generator;
pub mod movement;
pub mod turn;
