// handlers/protected/warehouse - /api/private/warehouse/*
pub mod container;
pub mod item;
pub mod location;
pub mod storage;
