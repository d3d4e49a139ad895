fn main() {
    vireon::main()
}
