// Notices published by the remote peer.
pub const TOPIC_PEER_TEMP: &str = "smartac/peer/notice/temperature";
pub const TOPIC_PEER_OCC_CHANGE: &str = "smartac/peer/notice/occupancy";
pub const TOPIC_PEER_LOG: &str = "smartac/peer/notice/log";

// Commands and requests the controller sends to the peer.
pub const TOPIC_CMD_POWER: &str = "smartac/cmnd/peer/power";
pub const TOPIC_CMD_MODE: &str = "smartac/cmnd/peer/mode";
pub const TOPIC_CMD_TARGET: &str = "smartac/cmnd/peer/temp";
pub const TOPIC_CMD_TEMP_REQUEST: &str = "smartac/cmnd/peer/temp-request";

// Commands and requests from operator clients.
pub const TOPIC_USER_POWER: &str = "smartac/user/power";
pub const TOPIC_USER_MODE: &str = "smartac/user/mode";
pub const TOPIC_USER_TARGET: &str = "smartac/user/temp";
pub const TOPIC_USER_OCCUPANCY: &str = "smartac/user/occupancy";
pub const TOPIC_USER_REFRESH: &str = "smartac/user/refresh";

// Controller output.
pub const TOPIC_SERVER_STATUS: &str = "smartac/server/status";
pub const TOPIC_SERVER_LOG: &str = "smartac/server/log";
pub const TOPIC_GLOBAL_LOG: &str = "smartac/global/log";
