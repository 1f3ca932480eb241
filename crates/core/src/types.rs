/// Primary keys of the `projects` table (AUTO_INCREMENT integers).
pub type DbId = i64;
