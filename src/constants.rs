/// CAS（Compare-And-Swap）操作最大重试次数
pub const MAX_CAS_RETRIES: u32 = 20;

/// 请求体大小上限
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 答题记录列表接口默认条数
pub const DEFAULT_RESPONSE_PAGE_SIZE: usize = 50;

/// 答题记录列表接口最大条数
pub const MAX_RESPONSE_PAGE_SIZE: usize = 500;

/// XP 衰减任务每批读取的用户数
pub const XP_DECAY_PAGE_SIZE: usize = 500;
