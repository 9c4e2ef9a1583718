// Every route here sits behind `require_permission`; handlers can assume
// the caller is an activated principal holding the route's permission.
pub mod puzzles;
