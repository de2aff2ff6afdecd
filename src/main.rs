fn main() {
    identityhub_lib::run()
}
