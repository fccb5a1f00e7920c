use clap::Parser;

use eval_gist::error::NiceError;
use eval_gist::{main_local, Opt};

fn main() {
    let opt = Opt::parse();
    opt.logger.enable_log();
    main_local(opt).nice_unwrap()
}
