#![cfg_attr(target_arch = "riscv32", no_std)]
#![cfg_attr(target_arch = "riscv32", no_main)]

#[cfg(target_arch = "riscv32")]
mod rt;

#[cfg(not(target_arch = "riscv32"))]
fn main() {
    println!("tacho firmware runs on riscv32 only; use `cargo run -p tacho-tests --bin simulate` on the host");
}
