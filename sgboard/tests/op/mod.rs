mod board;
mod continuous;
mod desync;
mod finite;
