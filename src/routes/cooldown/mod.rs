mod handler;
mod model;

pub use handler::{
    backup_now, check_cooldown, del_cooldown, get_cooldown, set_cooldown, sweep_expired,
};
pub use model::{
    BackupResponse, CheckCooldownResponse, CooldownStatusResponse, RemovedResponse,
    SetCooldownResponse,
};
