mod capture;
mod mode;
