fn main() {
    tanamap::run()
}
