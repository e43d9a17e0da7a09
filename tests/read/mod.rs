mod fat;
mod file;
