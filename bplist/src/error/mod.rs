/*!
 Errors that can happen when reading binary property list data.
*/

pub mod decode;
