//! ScholChat 班级管理面板服务
//!
//! 基于 Actix Web 构建，位于管理面板前端与 ScholChat 后端之间，
//! 负责班级生命周期操作的校验、去重与列表展示。
//!
//! # 架构
//! - `cache`: 驳回理由目录缓存（Moka）
//! - `client`: ScholChat 后端客户端（reqwest）
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `lifecycle`: 班级状态机与角色策略
//! - `middlewares`: 会话与角色中间件
//! - `modals`: 班级操作对话框与进行中请求表
//! - `models`: 数据模型定义
//! - `presenter`: 班级列表的搜索、筛选、排序与分页
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `utils`: 工具函数

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod middlewares;
pub mod modals;
pub mod models;
pub mod presenter;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod utils;
