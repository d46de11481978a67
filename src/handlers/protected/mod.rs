// Protected handlers: every route here sits behind `middleware::require_user`.

pub mod items;
