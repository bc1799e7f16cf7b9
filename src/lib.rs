pub mod addr;
pub mod checksum;
pub mod ip;
pub mod overlay;
pub mod packet;
pub mod tcp;
pub mod trace;

#[cfg(test)]
mod test;
