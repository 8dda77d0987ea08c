/*!
Shared types.
*/

pub mod err;
